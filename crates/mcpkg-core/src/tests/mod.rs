use super::*;

mod registry_end_to_end;
