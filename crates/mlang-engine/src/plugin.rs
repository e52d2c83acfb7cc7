//! Wiring of the engine into a host's event flow.
//!
//! [`MultilangPlugin`] is attached once per editor when the capability flag
//! allows it. It decorates the loaded content, exposes the toolbar menu and
//! then handles three kinds of host events:
//!
//! | Event | Handler |
//! |---|---|
//! | menu item chosen | [`insert_tag`] |
//! | selection changed | [`normalize_selection`] |
//! | submit requested | [`clean`], then resubmit |
//!
//! Submission is intercepted exactly once: the first request is prevented,
//! the buffer is cleaned and written back, the listener disarms itself and
//! asks the host to submit again. The second request passes straight through,
//! so persistence never sees decorated markers.

use std::borrow::Cow;

use crate::error::EngineError;
use crate::host::EditingHost;
use crate::insert::insert_tag;
use crate::languages::{LanguageList, MenuEntry, menu_entries};
use crate::normalize::{NormalizeOutcome, normalize_selection};
use crate::transform::{clean, decorate};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostEvent<'a> {
    /// A toolbar entry was clicked; carries its language code.
    MenuItemChosen(&'a str),
    SelectionChanged,
    SubmitRequested,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Handled,
    /// Nothing to do; the host carries on as usual.
    Ignored,
    /// The host must not run its default action for this event.
    DefaultPrevented,
}

#[derive(Debug, Clone)]
pub struct MultilangPlugin {
    menu: Vec<MenuEntry>,
    submit_armed: bool,
}

impl MultilangPlugin {
    /// Attach to `host` if `capability` allows it.
    ///
    /// On attach the host content is decorated once. The host is not marked
    /// dirty for this, since decoration is an editing-time view only.
    pub fn attach<H: EditingHost + ?Sized>(
        host: &mut H,
        capability: bool,
        languages: &LanguageList,
    ) -> Option<Self> {
        if !capability {
            log::info!("multilang capability missing, not attaching");
            return None;
        }

        let content = host.content();
        if let Cow::Owned(decorated) = decorate(&content) {
            host.set_content(&decorated);
        }

        let menu = menu_entries(languages);
        log::info!("multilang attached with {} language(s)", menu.len());
        Some(Self {
            menu,
            submit_armed: true,
        })
    }

    /// Toolbar entries in configured order.
    pub fn menu(&self) -> &[MenuEntry] {
        &self.menu
    }

    pub fn is_submit_armed(&self) -> bool {
        self.submit_armed
    }

    pub fn handle<H: EditingHost + ?Sized>(
        &mut self,
        host: &mut H,
        event: HostEvent<'_>,
    ) -> Result<Disposition, EngineError> {
        match event {
            HostEvent::MenuItemChosen(code) => {
                insert_tag(host, code);
                Ok(Disposition::Handled)
            }
            HostEvent::SelectionChanged => match normalize_selection(host)? {
                NormalizeOutcome::Expanded(_) => Ok(Disposition::Handled),
                NormalizeOutcome::Unchanged => Ok(Disposition::Ignored),
            },
            HostEvent::SubmitRequested => Ok(self.intercept_submit(host)),
        }
    }

    fn intercept_submit<H: EditingHost + ?Sized>(&mut self, host: &mut H) -> Disposition {
        if !self.submit_armed {
            return Disposition::Ignored;
        }

        let content = host.content();
        if let Cow::Owned(cleaned) = clean(&content) {
            host.set_content(&cleaned);
            host.mark_dirty();
        }

        self.submit_armed = false;
        log::info!("markers cleaned, resubmitting");
        host.resubmit();
        Disposition::DefaultPrevented
    }
}

/// Hosts that queue the resubmission requested through
/// [`EditingHost::resubmit`].
pub trait SubmitQueue {
    /// Take the pending resubmission, if any.
    fn take_resubmit(&mut self) -> bool;

    /// Called with the content once a submission reaches persistence.
    fn record_submission(&mut self, _content: String) {}
}

impl SubmitQueue for crate::Document {
    fn take_resubmit(&mut self) -> bool {
        crate::Document::take_resubmit(self)
    }

    fn record_submission(&mut self, content: String) {
        crate::Document::record_submission(self, content)
    }
}

/// A host together with its (optional) plugin, dispatching events the way an
/// editor's event loop would.
pub struct EditorSession<H> {
    host: H,
    plugin: Option<MultilangPlugin>,
}

impl<H: EditingHost + SubmitQueue> EditorSession<H> {
    /// Load `host` into a session, attaching the plugin when allowed.
    pub fn open(mut host: H, capability: bool, languages: &LanguageList) -> Self {
        let plugin = MultilangPlugin::attach(&mut host, capability, languages);
        Self { host, plugin }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn plugin(&self) -> Option<&MultilangPlugin> {
        self.plugin.as_ref()
    }

    /// Toolbar entries; empty when the plugin is not attached.
    pub fn menu(&self) -> &[MenuEntry] {
        self.plugin
            .as_ref()
            .map(|plugin| plugin.menu())
            .unwrap_or_default()
    }

    pub fn dispatch(&mut self, event: HostEvent<'_>) -> Result<Disposition, EngineError> {
        match self.plugin.as_mut() {
            Some(plugin) => plugin.handle(&mut self.host, event),
            None => Ok(Disposition::Ignored),
        }
    }

    pub fn choose_language(&mut self, code: &str) -> Result<Disposition, EngineError> {
        self.dispatch(HostEvent::MenuItemChosen(code))
    }

    pub fn selection_changed(&mut self) -> Result<Disposition, EngineError> {
        self.dispatch(HostEvent::SelectionChanged)
    }

    /// Run a submission through to persistence.
    ///
    /// Returns the content the host persists, or `None` if a handler
    /// prevented the submission without asking for it to be resubmitted.
    pub fn submit(&mut self) -> Result<Option<String>, EngineError> {
        loop {
            match self.dispatch(HostEvent::SubmitRequested)? {
                Disposition::DefaultPrevented => {
                    if !self.host.take_resubmit() {
                        log::warn!("submission prevented and not resubmitted");
                        return Ok(None);
                    }
                }
                Disposition::Handled | Disposition::Ignored => break,
            }
        }

        let persisted = self.host.content();
        self.host.record_submission(persisted.clone());
        Ok(Some(persisted))
    }

    pub fn into_host(self) -> H {
        self.host
    }
}
