//! Contact form
//!
//! Submission is simulated: the form goes pending for `submit_delay_ms`,
//! then clears every field and pops the success message in. There is no
//! network round trip.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::OnceLock;

use regex::Regex;
use tracing::{debug, info};
use vitrine_animation::{AnimatedTween, Easing, PropSet, Purpose, TargetKey, Tween};
use vitrine_core::{ElementId, TimerId};

use crate::error::{Result, SiteError};
use crate::host::HostContext;

const SUCCESS_POP_MS: f32 = 500.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FormField {
    Name,
    Email,
    Phone,
    Company,
    Message,
}

impl FormField {
    pub const ALL: [FormField; 5] = [
        FormField::Name,
        FormField::Email,
        FormField::Phone,
        FormField::Company,
        FormField::Message,
    ];

    pub fn is_required(self) -> bool {
        matches!(self, FormField::Name | FormField::Email | FormField::Message)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FormField::Name => "name",
            FormField::Email => "email",
            FormField::Phone => "phone",
            FormField::Company => "company",
            FormField::Message => "message",
        }
    }
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Current input values
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ContactFields {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub company: String,
    pub message: String,
}

impl ContactFields {
    pub fn get(&self, field: FormField) -> &str {
        match field {
            FormField::Name => &self.name,
            FormField::Email => &self.email,
            FormField::Phone => &self.phone,
            FormField::Company => &self.company,
            FormField::Message => &self.message,
        }
    }

    fn slot(&mut self, field: FormField) -> &mut String {
        match field {
            FormField::Name => &mut self.name,
            FormField::Email => &mut self.email,
            FormField::Phone => &mut self.phone,
            FormField::Company => &mut self.company,
            FormField::Message => &mut self.message,
        }
    }

    pub fn is_empty(&self) -> bool {
        FormField::ALL.iter().all(|&f| self.get(f).is_empty())
    }

    /// First failing field wins, in form order
    pub fn validate(&self) -> Result<()> {
        for field in FormField::ALL {
            let value = self.get(field).trim();
            if field.is_required() && value.is_empty() {
                return Err(SiteError::InvalidField {
                    field,
                    reason: "is required",
                });
            }
        }
        if !is_email(self.email.trim()) {
            return Err(SiteError::InvalidField {
                field: FormField::Email,
                reason: "is not a valid address",
            });
        }
        Ok(())
    }
}

fn email_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").ok())
        .as_ref()
}

fn is_email(value: &str) -> bool {
    email_pattern().is_some_and(|re| re.is_match(value))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubmitState {
    Idle,
    Pending,
    /// Success message showing; cleared by the next edit or [`ContactForm::dismiss`]
    Success,
}

struct ContactInner {
    ctx: HostContext,
    this: Weak<RefCell<ContactInner>>,
    success: ElementId,
    fields: ContactFields,
    state: SubmitState,
    timer: Option<TimerId>,
    pop: Option<AnimatedTween>,
    submissions: u32,
}

impl ContactInner {
    fn submit(&mut self) -> Result<()> {
        if self.state == SubmitState::Pending {
            return Err(SiteError::SubmitInProgress);
        }
        self.fields.validate()?;

        self.state = SubmitState::Pending;
        self.pop = None;
        let delay = self.ctx.config().submit_delay_ms;
        let weak = self.this.clone();
        self.timer = Some(self.ctx.timers().set_timeout(delay, move || {
            if let Some(inner) = weak.upgrade() {
                inner.borrow_mut().on_sent();
            }
        }));
        debug!(delay_ms = delay, "contact form pending");
        Ok(())
    }

    fn on_sent(&mut self) {
        self.timer = None;
        self.fields = ContactFields::default();
        self.state = SubmitState::Success;
        self.submissions += 1;
        self.pop = Some(self.ctx.animations().animate(
            TargetKey::new(self.success, Purpose::Entrance),
            Tween::from_to(
                PropSet::new().scale(0.0).opacity(0.0),
                PropSet::new().scale(1.0).opacity(1.0),
                SUCCESS_POP_MS,
            )
            .easing(Easing::BACK_OUT),
        ));
        info!(submissions = self.submissions, "contact form sent");
    }

    fn teardown(&mut self) {
        if let Some(id) = self.timer.take() {
            self.ctx.timers().clear(id);
        }
        self.pop = None;
    }
}

/// Contact form with a simulated submit
pub struct ContactForm {
    inner: Rc<RefCell<ContactInner>>,
}

impl ContactForm {
    /// `success` is the element holding the success message; it starts hidden
    pub fn mount(ctx: &HostContext, success: ElementId) -> Self {
        ctx.animations()
            .apply(success, &PropSet::new().scale(0.0).opacity(0.0));
        let inner = Rc::new_cyclic(|this| {
            RefCell::new(ContactInner {
                ctx: ctx.clone(),
                this: this.clone(),
                success,
                fields: ContactFields::default(),
                state: SubmitState::Idle,
                timer: None,
                pop: None,
                submissions: 0,
            })
        });
        Self { inner }
    }

    /// Edit a field; ignored while a submission is pending
    pub fn set(&self, field: FormField, value: impl Into<String>) -> bool {
        let mut inner = self.inner.borrow_mut();
        if inner.state == SubmitState::Pending {
            return false;
        }
        if inner.state == SubmitState::Success {
            inner.state = SubmitState::Idle;
        }
        *inner.fields.slot(field) = value.into();
        true
    }

    pub fn fields(&self) -> ContactFields {
        self.inner.borrow().fields.clone()
    }

    pub fn state(&self) -> SubmitState {
        self.inner.borrow().state
    }

    pub fn is_submitting(&self) -> bool {
        self.state() == SubmitState::Pending
    }

    /// Completed submissions since mount
    pub fn submissions(&self) -> u32 {
        self.inner.borrow().submissions
    }

    pub fn submit(&self) -> Result<()> {
        self.inner.borrow_mut().submit()
    }

    /// Hide the success message and return to idle
    pub fn dismiss(&self) {
        let mut inner = self.inner.borrow_mut();
        if inner.state != SubmitState::Success {
            return;
        }
        inner.state = SubmitState::Idle;
        inner.pop = None;
        let success = inner.success;
        inner
            .ctx
            .animations()
            .apply(success, &PropSet::new().scale(0.0).opacity(0.0));
    }

    pub fn unmount(&self) {
        self.inner.borrow_mut().teardown();
    }
}

impl Drop for ContactForm {
    fn drop(&mut self) {
        self.unmount();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::Host;
    use vitrine_core::Rect;

    fn filled(form: &ContactForm) {
        form.set(FormField::Name, "Dana");
        form.set(FormField::Email, "dana@example.com");
        form.set(FormField::Message, "Stand for the spring show");
    }

    fn mount(host: &Host) -> (ContactForm, ElementId) {
        let success = host
            .layout()
            .insert("contact.success", Rect::new(0.0, 3000.0, 400.0, 80.0));
        (ContactForm::mount(&host.context(), success), success)
    }

    #[test]
    fn test_validation() {
        let mut fields = ContactFields::default();
        let err = fields.validate().unwrap_err();
        assert!(matches!(
            err,
            SiteError::InvalidField {
                field: FormField::Name,
                ..
            }
        ));
        assert_eq!(err.to_string(), "name is required");

        fields.name = "Dana".into();
        fields.email = "dana at example".into();
        fields.message = "hi".into();
        assert!(matches!(
            fields.validate(),
            Err(SiteError::InvalidField {
                field: FormField::Email,
                ..
            })
        ));

        fields.email = "dana@example.com".into();
        assert!(fields.validate().is_ok());
    }

    #[test]
    fn test_submit_clears_and_pops_success() {
        let host = Host::desktop();
        let (form, success) = mount(&host);
        filled(&form);
        form.set(FormField::Company, "Acme");

        form.submit().unwrap();
        assert!(form.is_submitting());
        assert!(!form.set(FormField::Name, "ignored"));
        assert!(matches!(form.submit(), Err(SiteError::SubmitInProgress)));

        host.run_for(1990.0, 10.0);
        assert!(form.is_submitting());
        assert_eq!(form.fields().name, "Dana");

        host.advance(10.0);
        assert_eq!(form.state(), SubmitState::Success);
        assert!(form.fields().is_empty());
        assert_eq!(form.submissions(), 1);

        host.run_for(600.0, 16.0);
        let state = host.scheduler().state_of(success);
        assert_eq!(state.scale, 1.0);
        assert_eq!(state.opacity, 1.0);
    }

    #[test]
    fn test_invalid_submit_stays_idle() {
        let host = Host::desktop();
        let (form, _) = mount(&host);
        form.set(FormField::Name, "Dana");
        assert!(form.submit().is_err());
        assert_eq!(form.state(), SubmitState::Idle);
        assert_eq!(host.counts().pending_timers, 0);
    }

    #[test]
    fn test_edit_after_success_returns_to_idle() {
        let host = Host::desktop();
        let (form, success) = mount(&host);
        filled(&form);
        form.submit().unwrap();
        host.run_for(2600.0, 20.0);
        assert_eq!(form.state(), SubmitState::Success);

        form.dismiss();
        assert_eq!(form.state(), SubmitState::Idle);
        assert_eq!(host.scheduler().state_of(success).opacity, 0.0);

        filled(&form);
        form.submit().unwrap();
        host.advance(2000.0);
        form.set(FormField::Name, "Again");
        assert_eq!(form.state(), SubmitState::Idle);
    }

    #[test]
    fn test_unmount_while_pending() {
        let host = Host::desktop();
        let (form, _) = mount(&host);
        filled(&form);
        form.submit().unwrap();
        drop(form);
        assert!(host.counts().is_idle(), "{:?}", host.counts());
    }
}
