pub mod csv;
pub mod remote;
