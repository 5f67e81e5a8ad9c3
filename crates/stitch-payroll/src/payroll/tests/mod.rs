mod calculation;
mod common;
mod slips;
