pub mod prelude;

pub mod admins;
