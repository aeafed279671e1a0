pub mod history;
pub mod packet;
pub mod ports;
pub mod route;
pub mod table;
