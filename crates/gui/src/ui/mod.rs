pub mod object_list;
pub mod status_bar;
