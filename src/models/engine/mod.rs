pub mod constants;
pub mod hit_window;
pub mod hold;
pub mod note;
pub mod target;

pub use constants::*;
pub use hit_window::{DifficultyRange, HitWindow, HitWindowMode};
pub use hold::{BodyPolicy, HoldNote, HoldRules, HoldState, ReleaseLenience, TailPolicy};
pub use note::{Chart, NoteData, load_osu_chart};
pub use target::{Judgement, SubTarget, Target, TargetId, TargetKind, TargetPart};
