use super::{EntityMeta, MetadataError, PropertyMeta};

/// `User`: single-column id, regular columns, one counter kept in the shared counter table.
pub fn user_entity() -> Result<EntityMeta, MetadataError> {
    EntityMeta::new(
        "User",
        "users",
        vec![
            PropertyMeta::id("id"),
            PropertyMeta::simple("email"),
            PropertyMeta::simple("display_name"),
            PropertyMeta::simple("age"),
            PropertyMeta::counter("login_count"),
            PropertyMeta::wide_map("tags", ["tag"]),
        ],
    )
}

/// `TweetLine`: compound id clustered by user, then date, then tweet id.
/// Its counters live in the entity's own table.
pub fn tweet_line_entity() -> Result<EntityMeta, MetadataError> {
    EntityMeta::new(
        "TweetLine",
        "tweet_line",
        vec![
            PropertyMeta::embedded_id("id", ["user_id", "tweet_date", "tweet_id"])?,
            PropertyMeta::simple("content"),
            PropertyMeta::simple("status"),
            PropertyMeta::counter("likes"),
            PropertyMeta::counter("retweets"),
        ],
    )
}

/// Wide-row map of a user's tags, keyed by the tag name alone.
pub fn user_tag_property() -> PropertyMeta {
    PropertyMeta::wide_map("tags", ["tag"])
}

/// Wide-row index of tweets, keyed by `(tweet_date, tweet_id)`.
pub fn tweet_index_property() -> PropertyMeta {
    PropertyMeta::wide_map("tweet_index", ["tweet_date", "tweet_id"])
}
