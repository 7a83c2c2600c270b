pub mod beam;
pub mod greedy;
pub mod report;
pub mod scoring;
pub mod trellis;

#[cfg(test)]
mod tests;
