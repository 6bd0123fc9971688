//! Output generation for finished test case sets.

pub mod testcase_xml;

pub use testcase_xml::{default_file_name, testcases_xml, write_testcases, write_testcases_file};
