//! XML helpers shared by the XML source families.

mod utils;

pub use utils::{
    element_children, find_by_path, find_child, find_children, find_children_any,
    find_descendant, find_descendants, flatten_text, flatten_text_pieces, get_attribute,
    get_tag_name, get_text, has_tag, non_empty_text,
};
