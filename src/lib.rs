// Library for tests to access modules

pub mod config;
pub mod models;
pub mod notify;
pub mod probes;
pub mod report_worker;
pub mod sample_repo;
pub mod uptime;
pub mod version;
pub mod worker;
