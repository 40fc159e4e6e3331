mod ddb_full_load;
mod firehose_transformation;
