pub mod reputation_worker;
