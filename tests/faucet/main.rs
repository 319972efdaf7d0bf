mod orchestrator;
mod persistence;
