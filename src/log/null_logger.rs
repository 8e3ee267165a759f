/*!

Backend used when the `logging` feature is off. Nothing is printed; only the facade's maximum
level follows the configuration.

*/

use crate::log::LogConfiguration;

impl LogConfiguration {
    pub(in crate::log) fn apply(&mut self) {
        log::set_max_level(self.global_log_level);
    }
}
