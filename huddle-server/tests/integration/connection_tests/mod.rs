mod test_disconnect_is_idempotent;
