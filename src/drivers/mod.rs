pub mod ad8232;
