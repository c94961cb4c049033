mod cells;
mod eggs;
mod growth;
mod mortality;
mod reproduction;
mod stages;
