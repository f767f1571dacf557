// src/schema.rs

use polars::prelude::*;

pub const USER_ID: &str = "UserID";
pub const AGE_GROUP: &str = "AgeGroup";
pub const IS_BINGE_WATCHED: &str = "IsBingeWatched";

/// Column layout of the movie ratings CSV, in file order.
const MOVIE_RATINGS_COLUMNS: [(&str, DataType); 13] = [
    (USER_ID, DataType::Int32),
    ("MovieID", DataType::Int32),
    ("MovieTitle", DataType::String),
    ("Genre", DataType::String),
    ("Rating", DataType::Float32),
    ("ReviewCount", DataType::Int32),
    ("WatchedYear", DataType::Int32),
    ("UserLocation", DataType::String),
    (AGE_GROUP, DataType::String),
    ("StreamingPlatform", DataType::String),
    ("WatchTime", DataType::Int32),
    (IS_BINGE_WATCHED, DataType::Boolean),
    ("SubscriptionStatus", DataType::String),
];

/// Polars schema for the movie ratings input. Every column is nullable.
pub fn movie_ratings_schema() -> SchemaRef {
    let schema: Schema = MOVIE_RATINGS_COLUMNS
        .into_iter()
        .map(|(name, dtype)| (PlSmallStr::from_static(name), dtype))
        .collect();
    Arc::new(schema)
}
