//! Static issue-pattern tables
//!
//! Every predicate runs against lowercased `message + "\n" + stack` text.
//! Table order is the order issues are reported in.

use faultline_taxonomy::{ErrorCategory, IssueType, PlatformIssue, PlatformTag, ReportSeverity};
use once_cell::sync::Lazy;
use regex::Regex;

/// Predicate over lowercased diagnostic text
#[derive(Debug)]
pub(crate) enum Predicate {
    /// Any needle is a substring
    Any(&'static [&'static str]),
    /// Every needle is a substring
    All(&'static [&'static str]),
    /// Regex match
    Pattern(&'static Lazy<Regex>),
}

impl Predicate {
    pub(crate) fn matches(&self, haystack: &str) -> bool {
        match self {
            Self::Any(needles) => needles.iter().any(|n| haystack.contains(n)),
            Self::All(needles) => needles.iter().all(|n| haystack.contains(n)),
            Self::Pattern(re) => re.is_match(haystack),
        }
    }
}

/// Issue fields, minus the platform
#[derive(Debug)]
pub(crate) struct IssueTemplate {
    pub(crate) issue_type: IssueType,
    pub(crate) title: &'static str,
    pub(crate) description: &'static str,
    pub(crate) solution: &'static str,
    pub(crate) severity: ReportSeverity,
}

impl IssueTemplate {
    pub(crate) fn instantiate(&self, platform: PlatformTag) -> PlatformIssue {
        PlatformIssue {
            platform,
            issue_type: self.issue_type,
            title: self.title.to_string(),
            description: self.description.to_string(),
            solution: self.solution.to_string(),
            severity: self.severity,
        }
    }
}

/// Generic rule for one platform
#[derive(Debug)]
pub(crate) struct PatternRule {
    pub(crate) platform: PlatformTag,
    pub(crate) predicate: Predicate,
    pub(crate) template: IssueTemplate,
}

/// Extra rule that only applies to one error category
#[derive(Debug)]
pub(crate) struct CategoryRule {
    pub(crate) platform: PlatformTag,
    pub(crate) category: ErrorCategory,
    pub(crate) predicate: Predicate,
    pub(crate) template: IssueTemplate,
}

static MACOS_NETWORK_DENIED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(connection|socket|connect\(\)).{0,80}(not permitted|denied)")
        .expect("valid macos network pattern")
});

static WINDOWS_SYMLINK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(symlink|symbolic link).{0,80}(privilege|not held|developer mode)")
        .expect("valid windows symlink pattern")
});

static ANDROID_LOOPBACK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(localhost|127\.0\.0\.1)(:\d+)?.{0,80}(refused|failed)")
        .expect("valid android loopback pattern")
});

static IOS_ATS_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"nsurlerrordomain.{0,40}-1022").expect("valid ats pattern"));

pub(crate) static PLATFORM_RULES: &[PatternRule] = &[
    // Windows
    PatternRule {
        platform: PlatformTag::Windows,
        predicate: Predicate::Any(&[
            "path too long",
            "max_path",
            "filename or extension is too long",
        ]),
        template: IssueTemplate {
            issue_type: IssueType::FileSystem,
            title: "Path exceeds MAX_PATH",
            description: "A file path is longer than the 260 character Windows limit.",
            solution: "Move the project closer to the drive root or enable long paths \
                       (LongPathsEnabled registry key and `git config core.longpaths true`).",
            severity: ReportSeverity::Error,
        },
    },
    PatternRule {
        platform: PlatformTag::Windows,
        predicate: Predicate::Any(&[
            "being used by another process",
            "sharing violation",
        ]),
        template: IssueTemplate {
            issue_type: IssueType::FileSystem,
            title: "File locked by another process",
            description: "Windows refuses to open a file another process holds open.",
            solution: "Close editors, antivirus scans or running instances holding the file, \
                       then retry.",
            severity: ReportSeverity::Warning,
        },
    },
    PatternRule {
        platform: PlatformTag::Windows,
        predicate: Predicate::Any(&[
            "vcruntime",
            "msvcp",
            "the specified module could not be found",
        ]),
        template: IssueTemplate {
            issue_type: IssueType::Dependency,
            title: "Missing native DLL",
            description: "A native library or the Visual C++ runtime could not be loaded.",
            solution: "Install the Visual C++ Redistributable and ship plugin DLLs next to \
                       the executable.",
            severity: ReportSeverity::Error,
        },
    },
    PatternRule {
        platform: PlatformTag::Windows,
        predicate: Predicate::Pattern(&WINDOWS_SYMLINK),
        template: IssueTemplate {
            issue_type: IssueType::Build,
            title: "Symlink support disabled",
            description: "Creating symbolic links requires Developer Mode or elevation.",
            solution: "Enable Developer Mode in Settings > For developers.",
            severity: ReportSeverity::Error,
        },
    },
    // macOS
    PatternRule {
        platform: PlatformTag::MacOs,
        predicate: Predicate::Any(&["sandbox", "deny file-read", "deny file-write"]),
        template: IssueTemplate {
            issue_type: IssueType::Sandbox,
            title: "App Sandbox denied access",
            description: "The sandbox blocked access to a resource outside the container.",
            solution: "Add the matching entitlement (e.g. com.apple.security.files.user-selected.read-write) \
                       to DebugProfile.entitlements and Release.entitlements.",
            severity: ReportSeverity::Error,
        },
    },
    PatternRule {
        platform: PlatformTag::MacOs,
        predicate: Predicate::Pattern(&MACOS_NETWORK_DENIED),
        template: IssueTemplate {
            issue_type: IssueType::NetworkSecurity,
            title: "Missing network client entitlement",
            description: "Sandboxed macOS apps cannot open outgoing connections by default.",
            solution: "Add com.apple.security.network.client to both entitlements files.",
            severity: ReportSeverity::Error,
        },
    },
    PatternRule {
        platform: PlatformTag::MacOs,
        predicate: Predicate::Any(&["code signature", "codesign", "not notarized"]),
        template: IssueTemplate {
            issue_type: IssueType::Signing,
            title: "Code signing failure",
            description: "The binary or one of its frameworks is not signed as expected.",
            solution: "Check the signing team in Xcode and re-run codesign --deep --verify.",
            severity: ReportSeverity::Error,
        },
    },
    // Android
    PatternRule {
        platform: PlatformTag::Android,
        predicate: Predicate::Any(&[
            "cleartext",
            "not permitted by network security policy",
        ]),
        template: IssueTemplate {
            issue_type: IssueType::NetworkSecurity,
            title: "Cleartext HTTP traffic blocked",
            description: "Android 9+ blocks plain HTTP unless the network security config allows it.",
            solution: "Use HTTPS, or allow the host in res/xml/network_security_config.xml \
                       (android:usesCleartextTraffic for debug builds only).",
            severity: ReportSeverity::Error,
        },
    },
    PatternRule {
        platform: PlatformTag::Android,
        predicate: Predicate::Any(&[
            "permission denial",
            "securityexception",
            "requires android.permission",
        ]),
        template: IssueTemplate {
            issue_type: IssueType::Permission,
            title: "Missing Android permission",
            description: "An API was called without a declared or granted permission.",
            solution: "Declare the permission in AndroidManifest.xml and request it at runtime \
                       on API 23+.",
            severity: ReportSeverity::Error,
        },
    },
    PatternRule {
        platform: PlatformTag::Android,
        predicate: Predicate::Any(&["outofmemoryerror", "failed to allocate a"]),
        template: IssueTemplate {
            issue_type: IssueType::Memory,
            title: "Java heap exhausted",
            description: "The app exceeded its Dalvik/ART heap limit.",
            solution: "Downsample large images, release caches on onTrimMemory, and profile \
                       with the Android Studio memory profiler.",
            severity: ReportSeverity::Critical,
        },
    },
    PatternRule {
        platform: PlatformTag::Android,
        predicate: Predicate::Any(&["too many method references", "multidex"]),
        template: IssueTemplate {
            issue_type: IssueType::Build,
            title: "DEX method limit exceeded",
            description: "The app references more than 65,536 methods.",
            solution: "Raise minSdkVersion to 21+ or enable multidex in build.gradle.",
            severity: ReportSeverity::Error,
        },
    },
    PatternRule {
        platform: PlatformTag::Android,
        predicate: Predicate::Any(&["unsatisfiedlinkerror", "dlopen failed"]),
        template: IssueTemplate {
            issue_type: IssueType::Dependency,
            title: "Native library not packaged",
            description: "A JNI library is missing for the device ABI.",
            solution: "Check abiFilters and that the .so is packaged for arm64-v8a and armeabi-v7a.",
            severity: ReportSeverity::Error,
        },
    },
    // iOS
    PatternRule {
        platform: PlatformTag::Ios,
        predicate: Predicate::Any(&[
            "app transport security",
            "requires the use of a secure connection",
            "nsallowsarbitraryloads",
        ]),
        template: IssueTemplate {
            issue_type: IssueType::NetworkSecurity,
            title: "App Transport Security blocked the request",
            description: "iOS refuses insecure HTTP loads unless Info.plist grants an exception.",
            solution: "Serve the endpoint over HTTPS or add an NSExceptionDomains entry under \
                       NSAppTransportSecurity.",
            severity: ReportSeverity::Error,
        },
    },
    PatternRule {
        platform: PlatformTag::Ios,
        predicate: Predicate::Any(&[
            "usagedescription",
            "privacy-sensitive data",
        ]),
        template: IssueTemplate {
            issue_type: IssueType::Permission,
            title: "Missing privacy usage description",
            description: "Accessing protected resources requires a usage string in Info.plist.",
            solution: "Add the matching NS*UsageDescription key (camera, photos, location, ...) \
                       to Info.plist.",
            severity: ReportSeverity::Critical,
        },
    },
    PatternRule {
        platform: PlatformTag::Ios,
        predicate: Predicate::Any(&[
            "provisioning profile",
            "no signing certificate",
        ]),
        template: IssueTemplate {
            issue_type: IssueType::Signing,
            title: "Provisioning problem",
            description: "No valid provisioning profile or certificate matches the bundle id.",
            solution: "Open ios/Runner.xcworkspace and select a development team under \
                       Signing & Capabilities.",
            severity: ReportSeverity::Error,
        },
    },
    PatternRule {
        platform: PlatformTag::Ios,
        predicate: Predicate::Any(&[
            "main thread checker",
            "must be used from main thread only",
            "called on a background thread",
        ]),
        template: IssueTemplate {
            issue_type: IssueType::Threading,
            title: "UI API used off the main thread",
            description: "UIKit calls were made from a background thread.",
            solution: "Dispatch UI work to the main queue (DispatchQueue.main.async).",
            severity: ReportSeverity::Warning,
        },
    },
    PatternRule {
        platform: PlatformTag::Ios,
        predicate: Predicate::Any(&["pod install", "podfile", "cocoapods"]),
        template: IssueTemplate {
            issue_type: IssueType::Build,
            title: "CocoaPods out of sync",
            description: "Installed pods do not match the Podfile.lock.",
            solution: "Run `pod repo update && pod install` in the ios directory.",
            severity: ReportSeverity::Warning,
        },
    },
    // Linux
    PatternRule {
        platform: PlatformTag::Linux,
        predicate: Predicate::Any(&["too many open files", "emfile"]),
        template: IssueTemplate {
            issue_type: IssueType::FileSystem,
            title: "File descriptor limit reached",
            description: "The process hit its RLIMIT_NOFILE.",
            solution: "Close leaked handles or raise the limit with `ulimit -n` / LimitNOFILE.",
            severity: ReportSeverity::Error,
        },
    },
    PatternRule {
        platform: PlatformTag::Linux,
        predicate: Predicate::Any(&["permission denied", "eacces"]),
        template: IssueTemplate {
            issue_type: IssueType::Permission,
            title: "Filesystem permission denied",
            description: "The process user cannot access the path.",
            solution: "Check ownership and mode bits, and SELinux/AppArmor denials in the audit log.",
            severity: ReportSeverity::Error,
        },
    },
    PatternRule {
        platform: PlatformTag::Linux,
        predicate: Predicate::Any(&["address already in use", "eaddrinuse"]),
        template: IssueTemplate {
            issue_type: IssueType::Lifecycle,
            title: "Port already bound",
            description: "A previous instance or another service still owns the port.",
            solution: "Stop the other process (`ss -ltnp`) or set SO_REUSEADDR.",
            severity: ReportSeverity::Error,
        },
    },
    PatternRule {
        platform: PlatformTag::Linux,
        predicate: Predicate::Any(&[
            "error while loading shared libraries",
            "cannot open shared object file",
        ]),
        template: IssueTemplate {
            issue_type: IssueType::Dependency,
            title: "Shared library missing",
            description: "The dynamic loader could not find a required .so.",
            solution: "Install the distribution package providing the library or set LD_LIBRARY_PATH.",
            severity: ReportSeverity::Error,
        },
    },
    PatternRule {
        platform: PlatformTag::Linux,
        predicate: Predicate::Any(&["oom-killer", "out of memory: killed process"]),
        template: IssueTemplate {
            issue_type: IssueType::Memory,
            title: "Killed by the OOM killer",
            description: "The kernel terminated the process under memory pressure.",
            solution: "Lower memory usage or raise the cgroup memory limit.",
            severity: ReportSeverity::Critical,
        },
    },
    // Web
    PatternRule {
        platform: PlatformTag::Web,
        predicate: Predicate::Any(&[
            "cors",
            "access-control-allow-origin",
            "cross-origin",
        ]),
        template: IssueTemplate {
            issue_type: IssueType::Cors,
            title: "Cross-origin request blocked",
            description: "The server did not send CORS headers for this origin.",
            solution: "Return Access-Control-Allow-Origin from the server or proxy the request \
                       through the app's own origin.",
            severity: ReportSeverity::Error,
        },
    },
    PatternRule {
        platform: PlatformTag::Web,
        predicate: Predicate::All(&["mixed content", "insecure"]),
        template: IssueTemplate {
            issue_type: IssueType::NetworkSecurity,
            title: "Mixed content blocked",
            description: "An HTTPS page requested an HTTP resource.",
            solution: "Load every resource over HTTPS.",
            severity: ReportSeverity::Error,
        },
    },
    PatternRule {
        platform: PlatformTag::Web,
        predicate: Predicate::Any(&["quotaexceedederror", "exceeded the quota"]),
        template: IssueTemplate {
            issue_type: IssueType::Storage,
            title: "Browser storage quota exceeded",
            description: "localStorage or IndexedDB is full for this origin.",
            solution: "Evict stale entries and keep large blobs out of localStorage.",
            severity: ReportSeverity::Warning,
        },
    },
    PatternRule {
        platform: PlatformTag::Web,
        predicate: Predicate::Any(&[
            "dart:io",
            "platform._operatingsystem",
            "not supported on the web",
        ]),
        template: IssueTemplate {
            issue_type: IssueType::Dependency,
            title: "Native-only API used in the browser",
            description: "Code paths that need a native runtime were reached on the web build.",
            solution: "Guard platform-specific code behind a web check or use conditional imports.",
            severity: ReportSeverity::Error,
        },
    },
];

pub(crate) static CATEGORY_RULES: &[CategoryRule] = &[
    CategoryRule {
        platform: PlatformTag::Android,
        category: ErrorCategory::Network,
        predicate: Predicate::Any(&["http://", "connection refused", "econnrefused"]),
        template: IssueTemplate {
            issue_type: IssueType::NetworkSecurity,
            title: "Cleartext or loopback connection",
            description: "Plain HTTP endpoints are blocked by default and `localhost` inside \
                          the emulator is the emulator itself.",
            solution: "Use HTTPS or a network security config exception; reach the host \
                       machine through 10.0.2.2.",
            severity: ReportSeverity::Error,
        },
    },
    CategoryRule {
        platform: PlatformTag::Android,
        category: ErrorCategory::Network,
        predicate: Predicate::Pattern(&ANDROID_LOOPBACK),
        template: IssueTemplate {
            issue_type: IssueType::Lifecycle,
            title: "Emulator loopback address",
            description: "`localhost` resolves to the emulator, not the development machine.",
            solution: "Point the client at 10.0.2.2 or use `adb reverse tcp:<port> tcp:<port>`.",
            severity: ReportSeverity::Warning,
        },
    },
    CategoryRule {
        platform: PlatformTag::Ios,
        category: ErrorCategory::Network,
        predicate: Predicate::Any(&["http://", "nsurlerrordomain"]),
        template: IssueTemplate {
            issue_type: IssueType::NetworkSecurity,
            title: "Insecure load under App Transport Security",
            description: "Requests to non-HTTPS hosts fail unless ATS exceptions are configured.",
            solution: "Serve the endpoint over HTTPS or add an NSExceptionDomains entry.",
            severity: ReportSeverity::Error,
        },
    },
    CategoryRule {
        platform: PlatformTag::Ios,
        category: ErrorCategory::Network,
        predicate: Predicate::Pattern(&IOS_ATS_CODE),
        template: IssueTemplate {
            issue_type: IssueType::NetworkSecurity,
            title: "ATS error -1022",
            description: "NSURLErrorAppTransportSecurityRequiresSecureConnection was raised.",
            solution: "Serve the endpoint over HTTPS or add an NSExceptionDomains entry.",
            severity: ReportSeverity::Error,
        },
    },
    CategoryRule {
        platform: PlatformTag::MacOs,
        category: ErrorCategory::Network,
        predicate: Predicate::Any(&["connection", "socket"]),
        template: IssueTemplate {
            issue_type: IssueType::NetworkSecurity,
            title: "Network entitlement may be missing",
            description: "Sandboxed macOS apps need an entitlement for outgoing connections.",
            solution: "Add com.apple.security.network.client to both entitlements files.",
            severity: ReportSeverity::Warning,
        },
    },
    CategoryRule {
        platform: PlatformTag::Web,
        category: ErrorCategory::Network,
        predicate: Predicate::Any(&["xmlhttprequest", "failed to fetch", "http://"]),
        template: IssueTemplate {
            issue_type: IssueType::Cors,
            title: "Browser blocked the request",
            description: "Opaque fetch failures in browsers are usually CORS or mixed content.",
            solution: "Inspect the browser console network tab and configure CORS on the server.",
            severity: ReportSeverity::Error,
        },
    },
    CategoryRule {
        platform: PlatformTag::Android,
        category: ErrorCategory::FileSystem,
        predicate: Predicate::Any(&["permission denied", "eacces", "open failed"]),
        template: IssueTemplate {
            issue_type: IssueType::Permission,
            title: "Scoped storage restriction",
            description: "Android 10+ restricts direct access to shared external storage.",
            solution: "Use app-specific directories or the MediaStore / Storage Access Framework.",
            severity: ReportSeverity::Error,
        },
    },
    CategoryRule {
        platform: PlatformTag::Windows,
        category: ErrorCategory::FileSystem,
        predicate: Predicate::Any(&["access is denied", "permission"]),
        template: IssueTemplate {
            issue_type: IssueType::Permission,
            title: "Protected folder access",
            description: "Controlled folder access or UAC blocked the write.",
            solution: "Write under %LOCALAPPDATA% or allow the app in Windows Security.",
            severity: ReportSeverity::Error,
        },
    },
    CategoryRule {
        platform: PlatformTag::Ios,
        category: ErrorCategory::Performance,
        predicate: Predicate::Any(&["memory", "jetsam"]),
        template: IssueTemplate {
            issue_type: IssueType::Memory,
            title: "Jetsam memory pressure",
            description: "iOS terminates foreground apps that exceed their memory footprint.",
            solution: "Profile with Instruments (Allocations) and release image caches on \
                       memory warnings.",
            severity: ReportSeverity::Warning,
        },
    },
];

/// Operator-facing advice per platform, independent of any event
pub(crate) fn recommendations(platform: PlatformTag) -> &'static [&'static str] {
    match platform {
        PlatformTag::Windows => &[
            "Enable long path support for deep project directories.",
            "Exclude build directories from real-time antivirus scanning.",
        ],
        PlatformTag::MacOs => &[
            "Keep DebugProfile and Release entitlements in sync.",
            "Sign and notarize release builds before distribution.",
        ],
        PlatformTag::Android => &[
            "Serve all endpoints over HTTPS or declare a network security config.",
            "Request dangerous permissions at runtime, not only in the manifest.",
            "Test on a low-memory device profile.",
        ],
        PlatformTag::Ios => &[
            "Declare every NS*UsageDescription key the app needs.",
            "Avoid ATS exceptions in release builds.",
        ],
        PlatformTag::Linux => &[
            "Raise the open file limit for long-running services.",
            "Run under a dedicated user with least privilege.",
        ],
        PlatformTag::Web => &[
            "Configure CORS on every API the app calls.",
            "Guard native-only APIs behind a web check.",
        ],
    }
}
