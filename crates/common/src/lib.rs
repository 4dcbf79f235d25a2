// noteforge-common: shared types for the noteforge workspace

pub mod types;
