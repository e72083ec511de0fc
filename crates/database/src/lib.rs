pub mod access;
pub mod db;
pub mod entities;
pub mod error;
pub mod services;
pub mod storage;

#[cfg(test)]
mod test_utils;
