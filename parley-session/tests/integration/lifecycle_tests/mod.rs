pub mod test_end_room_idempotent;
pub mod test_load_room;
