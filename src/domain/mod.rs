pub(crate) mod note;
