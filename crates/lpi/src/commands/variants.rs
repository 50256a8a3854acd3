//! List the registered database and server types

use crate::output;
use lpi_installer::Role;

pub fn run() -> i32 {
    for role in [Role::JavaServer, Role::Database] {
        output::header(&format!("{} types", role));
        for key in role.keys() {
            output::item(key);
        }
    }
    0
}
