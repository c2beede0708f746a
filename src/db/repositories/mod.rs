mod profile;
mod sessions;
