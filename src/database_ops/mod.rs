pub mod db;
pub mod metacritic;
