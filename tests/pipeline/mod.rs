mod config;
mod end_to_end;
mod entry_points;
mod extraction;
mod isolation;
mod missing_tools;
mod search;
