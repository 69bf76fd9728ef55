//! Timetable generation engine for school administration systems.
//!
//! Given an immutable snapshot of teachers, rooms, class groups, subjects
//! and time slots, searches for a weekly class timetable that avoids hard
//! conflicts and honors as many soft preferences as possible, using a
//! genetic algorithm.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Teacher`, `Room`, `ClassGroup`, `Subject`,
//!   `TimeSlot`, `Requirement`, the `DomainModel` snapshot and `Timetable`
//! - **`validation`**: Input integrity checks (duplicate IDs, dangling references)
//! - **`ga`**: Chromosome encoding, genetic operators and the population manager
//! - **`evaluation`**: Hard/soft constraint evaluation and fitness
//! - **`engine`**: Configuration, run control and the generational loop
//! - **`report`**: Projection of the best chromosome into a timetable and report
//!
//! # Example
//!
//! ```no_run
//! use u_timetable::engine::{EngineConfig, EvolutionController};
//! use u_timetable::models::{DomainModel, DomainSnapshot};
//!
//! let snapshot = DomainSnapshot::new(); // filled by the host application
//! let domain = DomainModel::build(snapshot).unwrap();
//! let mut controller = EvolutionController::new(domain);
//! let outcome = controller
//!     .run(EngineConfig::default().with_seed(7), |stats| {
//!         println!("gen {} best {:.3}", stats.generation, stats.best_fitness);
//!     })
//!     .unwrap();
//! println!("{} lessons placed", outcome.timetable.len());
//! ```
//!
//! # References
//!
//! - Burke & Petrovic (2002), "Recent research directions in automated timetabling"
//! - Colorni, Dorigo & Maniezzo (1998), "Metaheuristics for high school timetabling"

pub mod engine;
pub mod error;
pub mod evaluation;
pub mod ga;
pub mod models;
pub mod report;
pub mod validation;

pub use error::EngineError;
