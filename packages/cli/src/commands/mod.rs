pub mod prefs;
pub mod serve;
