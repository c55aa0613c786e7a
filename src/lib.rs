pub mod cmdline;
pub mod consts;
pub mod errors;
pub mod feature_indexer;
pub mod learner;
pub mod learner_lambdarank;
pub mod learner_logloss;
pub mod logging_layer;
pub mod metrics;
pub mod model_instance;
pub mod murmur;
pub mod optimizer;
pub mod parser;
pub mod persistence;
pub mod record_reader;
pub mod version;
pub mod weight_store;
