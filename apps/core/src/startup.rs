use std::path::Path;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("command error: {0}")]
    Command(String),
    #[error("unsupported platform")]
    UnsupportedPlatform,
}

#[cfg(target_os = "windows")]
const RUN_SUBKEY: &str = r"Software\Microsoft\Windows\CurrentVersion\Run";
#[cfg(target_os = "windows")]
const VALUE_NAME: &str = "ezr";

/// The command line registered for launch at login.
pub fn startup_command_for_executable(executable_path: &Path) -> Result<String, StartupError> {
    if executable_path.as_os_str().is_empty() {
        return Err(StartupError::Command("executable path is empty".to_string()));
    }
    if !executable_path.is_file() {
        return Err(StartupError::Command(format!(
            "executable path is not a file: {}",
            executable_path.display()
        )));
    }

    Ok(format!("\"{}\"", executable_path.to_string_lossy()))
}

/// Applies the `autoStartApp` setting for the running executable.
pub fn sync_with_config(auto_start: bool) -> Result<(), StartupError> {
    let executable = std::env::current_exe()?;
    if is_enabled()? == auto_start {
        return Ok(());
    }
    set_enabled(auto_start, &executable)
}

#[cfg(target_os = "windows")]
pub fn is_enabled() -> Result<bool, StartupError> {
    use windows_sys::Win32::System::Registry::KEY_QUERY_VALUE;

    match registry::RunKey::open(KEY_QUERY_VALUE)? {
        Some(key) => key.has_value(VALUE_NAME),
        None => Ok(false),
    }
}

#[cfg(target_os = "windows")]
pub fn set_enabled(enabled: bool, executable_path: &Path) -> Result<(), StartupError> {
    use windows_sys::Win32::System::Registry::KEY_SET_VALUE;

    if enabled {
        let command = startup_command_for_executable(executable_path)?;
        return registry::RunKey::create()?.set_value(VALUE_NAME, &command);
    }

    match registry::RunKey::open(KEY_SET_VALUE)? {
        Some(key) => key.delete_value(VALUE_NAME),
        None => Ok(()),
    }
}

/// HKCU `Run` key handle, closed on drop.
#[cfg(target_os = "windows")]
mod registry {
    use windows_sys::Win32::Foundation::{ERROR_FILE_NOT_FOUND, ERROR_SUCCESS, WIN32_ERROR};
    use windows_sys::Win32::System::Registry::{
        RegCloseKey, RegCreateKeyExW, RegDeleteValueW, RegOpenKeyExW, RegQueryValueExW,
        RegSetValueExW, HKEY, HKEY_CURRENT_USER, KEY_SET_VALUE, REG_SAM_FLAGS, REG_SZ,
    };

    use super::{StartupError, RUN_SUBKEY};

    pub(super) struct RunKey(HKEY);

    impl RunKey {
        /// `None` when the key does not exist yet.
        pub(super) fn open(access: REG_SAM_FLAGS) -> Result<Option<Self>, StartupError> {
            let subkey = to_wide(RUN_SUBKEY);
            let mut key = std::ptr::null_mut();
            let status =
                unsafe { RegOpenKeyExW(HKEY_CURRENT_USER, subkey.as_ptr(), 0, access, &mut key) };
            match status {
                ERROR_SUCCESS => Ok(Some(Self(key))),
                ERROR_FILE_NOT_FOUND => Ok(None),
                other => Err(registry_error("open run key", other)),
            }
        }

        pub(super) fn create() -> Result<Self, StartupError> {
            let subkey = to_wide(RUN_SUBKEY);
            let mut key = std::ptr::null_mut();
            let status = unsafe {
                RegCreateKeyExW(
                    HKEY_CURRENT_USER,
                    subkey.as_ptr(),
                    0,
                    std::ptr::null(),
                    0,
                    KEY_SET_VALUE,
                    std::ptr::null(),
                    &mut key,
                    std::ptr::null_mut(),
                )
            };
            if status != ERROR_SUCCESS {
                return Err(registry_error("create run key", status));
            }
            Ok(Self(key))
        }

        pub(super) fn has_value(&self, name: &str) -> Result<bool, StartupError> {
            let name = to_wide(name);
            let mut value_type = 0_u32;
            let mut size = 0_u32;
            let status = unsafe {
                RegQueryValueExW(
                    self.0,
                    name.as_ptr(),
                    std::ptr::null(),
                    &mut value_type,
                    std::ptr::null_mut(),
                    &mut size,
                )
            };
            match status {
                ERROR_SUCCESS => Ok(true),
                ERROR_FILE_NOT_FOUND => Ok(false),
                other => Err(registry_error("query run value", other)),
            }
        }

        pub(super) fn set_value(&self, name: &str, value: &str) -> Result<(), StartupError> {
            let name = to_wide(name);
            let data = to_wide(value);
            let status = unsafe {
                RegSetValueExW(
                    self.0,
                    name.as_ptr(),
                    0,
                    REG_SZ,
                    data.as_ptr() as *const u8,
                    (data.len() * std::mem::size_of::<u16>()) as u32,
                )
            };
            if status != ERROR_SUCCESS {
                return Err(registry_error("set run value", status));
            }
            Ok(())
        }

        pub(super) fn delete_value(&self, name: &str) -> Result<(), StartupError> {
            let name = to_wide(name);
            match unsafe { RegDeleteValueW(self.0, name.as_ptr()) } {
                ERROR_SUCCESS | ERROR_FILE_NOT_FOUND => Ok(()),
                other => Err(registry_error("delete run value", other)),
            }
        }
    }

    impl Drop for RunKey {
        fn drop(&mut self) {
            unsafe {
                RegCloseKey(self.0);
            }
        }
    }

    fn to_wide(value: &str) -> Vec<u16> {
        value.encode_utf16().chain(std::iter::once(0)).collect()
    }

    fn registry_error(action: &str, status: WIN32_ERROR) -> StartupError {
        StartupError::Command(format!("{action} failed with code {status}"))
    }
}

#[cfg(not(target_os = "windows"))]
pub fn is_enabled() -> Result<bool, StartupError> {
    Err(StartupError::UnsupportedPlatform)
}

#[cfg(not(target_os = "windows"))]
pub fn set_enabled(_enabled: bool, _executable_path: &Path) -> Result<(), StartupError> {
    Err(StartupError::UnsupportedPlatform)
}
