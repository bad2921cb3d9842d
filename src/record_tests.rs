use crate::record::*;

#[test]
fn rel_path_at_root_omits_slash() {
    let r = Record::new("", "AA", "deadbeef");
    assert_eq!(r.rel_path(), "AA");
}

#[test]
fn rel_path_below_root_joins_with_slash() {
    let r = Record::new("aa/bb/cc", "AA", "deadbeef");
    assert_eq!(r.rel_path(), "aa/bb/cc/AA");
}
