mod cli;
mod instances;
mod variants;
