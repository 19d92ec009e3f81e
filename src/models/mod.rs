pub mod attendance;
pub mod group;
pub mod group_work;
pub mod labourer;
pub mod payment;
pub mod upsert;
