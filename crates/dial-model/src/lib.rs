mod domain;
pub use domain::{AttrMap, AttrValue, TaskName};

mod patch;
pub use patch::{RestoreEntry, RestorePatch, SettingsPatch};

mod reply;
pub use reply::ControlReply;

mod report;
pub use report::SettingsReport;
