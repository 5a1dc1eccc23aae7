//! Balance simulator for Egg Empire.
//! Run with: cargo test simulate_greedy -- --nocapture
