mod test_member_set_tracks_joins_and_leaves;
mod test_rejoin_is_idempotent;
