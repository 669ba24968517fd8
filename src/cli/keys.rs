use tabled::Table;

use crate::utils;

pub fn keys() {
    let table = Table::new(utils::build_sort_key_rows());
    println!("{}", table);
}
