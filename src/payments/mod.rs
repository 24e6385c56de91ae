pub mod random_gateway;
