//! drop training_data

use crate::ast::Operation;
use crate::migrate::Migration;

use super::r1f0a5c3e9b21_initial_tables::training_data_columns;

pub fn migration() -> Migration {
    Migration::new("3e5d0c8a91b4", Some("07930e245345"), "drop training_data")
        .created("2024-03-11 11:49:27.473092")
        .forward(Operation::drop_table("training_data"))
        .reverse(Operation::create_table(
            "training_data",
            training_data_columns(),
        ))
}
