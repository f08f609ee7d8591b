pub mod age;
pub mod create_channel;
pub mod disable_node;
pub mod getroutes;
pub mod inform_channel;
pub mod listlayers;
pub mod reserve;
pub mod status;
