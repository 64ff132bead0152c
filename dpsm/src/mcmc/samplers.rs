pub mod split_merge;
