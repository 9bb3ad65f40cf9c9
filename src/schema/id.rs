use xxhash_rust::xxh64::xxh64;

/// Derives the id of a node from the namespace of the schema it lives in and
/// its structural pointer inside that schema.
///
/// The same `(namespace, pointer)` pair always yields the same id, so a schema
/// can be flattened any number of times without invalidating stored
/// correspondences.
pub fn node_id(namespace: &str, pointer: &str) -> String {
    let key = format!("{}#{}", namespace, pointer);
    format!("{:016x}", xxh64(key.as_bytes(), 0))
}

/// Pointer segment for an object property. `/` and `~` are escaped the way
/// JSON Pointer does it so distinct property names never collide.
pub(crate) fn property_segment(name: &str) -> String {
    format!("/properties/{}", name.replace('~', "~0").replace('/', "~1"))
}

pub(crate) const ITEMS_SEGMENT: &str = "/items";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_stable_and_namespaced() {
        let a = node_id("crm:/users:get:response", "/properties/id");
        assert_eq!(a, node_id("crm:/users:get:response", "/properties/id"));
        assert_eq!(a.len(), 16);
        assert_ne!(a, node_id("crm:/users:post:request", "/properties/id"));
    }

    #[test]
    fn test_escaped_segments_do_not_collide() {
        assert_ne!(property_segment("a/b"), property_segment("a") + "/b");
    }
}
