pub mod recipient_cache;
