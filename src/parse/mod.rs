//! Parsers for the test log and the robot scripts it embeds.

pub mod robot_script;
pub mod test_log;
