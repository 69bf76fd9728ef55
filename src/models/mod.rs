//! Timetabling domain models.
//!
//! Plain serde-serializable entities with builder methods, the
//! [`DomainSnapshot`] that bundles them as engine input, and the
//! validated [`DomainModel`] with derived lookup indices.
//!
//! | Entity | Role |
//! |--------|------|
//! | Teacher | Human resource with qualifications and availability |
//! | Room | Spatial resource (theory or practical) |
//! | ClassGroup | Students attending lessons together |
//! | Subject | Curriculum unit with weekly hours |
//! | TimeSlot | One teaching period of the week |
//! | Requirement | (class, subject, hours) curriculum entry |
//! | Timetable | Decoded solution |

mod class_group;
mod domain;
mod preference;
mod requirement;
mod room;
mod subject;
mod teacher;
mod time_slot;
mod timetable;

pub use class_group::ClassGroup;
pub use domain::{DomainModel, DomainSnapshot, Lesson, ResolvedRequirement};
pub use preference::Preferences;
pub use requirement::Requirement;
pub use room::{Room, RoomType};
pub use subject::Subject;
pub use teacher::Teacher;
pub use time_slot::{Day, TimeSlot};
pub use timetable::{Timetable, TimetableEntry};
