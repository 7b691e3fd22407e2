use crate::types::Bar;

pub mod csv_data_feed;

pub trait DataFeed: Send {
    fn name(&self) -> &str;
    fn next_bar(&mut self) -> Option<Bar>;
}
