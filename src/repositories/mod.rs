pub(crate) mod answer_keys;
