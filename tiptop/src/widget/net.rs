use tracing::warn;

use super::Widget;
use crate::metrics::MetricsProvider;
use crate::panel::{Panel, Tone};

const NAME: &str = "net";

/// Network identity of the host.
pub struct NetWidget {
    address: Option<String>,
    panel: Panel,
}

impl NetWidget {
    pub fn new() -> NetWidget {
        let mut widget = NetWidget {
            address: None,
            panel: Panel::default(),
        };
        widget.panel = widget.build_panel();
        widget
    }

    pub fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }

    fn build_panel(&self) -> Panel {
        let title = match &self.address {
            Some(address) => format!("{} - {}", NAME, address),
            None => NAME.to_string(),
        };
        Panel::new(title, Tone::Ansi(1))
    }
}

impl Default for NetWidget {
    fn default() -> Self {
        Self::new()
    }
}

impl Widget for NetWidget {
    fn name(&self) -> &str {
        NAME
    }

    fn on_tick(&mut self, provider: &mut dyn MetricsProvider) {
        match provider.host_address() {
            Ok(address) => self.address = Some(address),
            Err(e) => warn!("{}", e),
        }
        self.panel = self.build_panel();
    }

    fn panel(&self) -> &Panel {
        &self.panel
    }
}
