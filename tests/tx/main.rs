// Transaction integration tests

mod codec_test;
